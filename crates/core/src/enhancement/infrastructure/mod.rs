mod bilateral;
mod clahe;
mod gaussian;
mod lab;
pub mod light_enhancer;
