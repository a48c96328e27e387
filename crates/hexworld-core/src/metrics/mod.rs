pub mod biomes;
pub mod land;
pub mod seams;

pub use biomes::compute_biome_histogram;
pub use land::{
    compute_land_components, compute_land_fraction, compute_ocean_components, ComponentsResult,
};
pub use seams::{compute_seam_continuity, SeamResult};
