// Domain layer: roster entities, page copy and the ports the page pipeline
// talks through. No IO here.

pub mod labels;
pub mod model;
pub mod ports;
