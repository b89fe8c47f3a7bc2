pub mod ugc;
