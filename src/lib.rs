// Library exports for findmark

pub mod locator;
pub mod normalize;
pub mod replace;
pub mod search;
pub mod visibility;
