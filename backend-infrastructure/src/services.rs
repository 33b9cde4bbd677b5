pub mod cloudinary_assets;
pub mod firebase_identity;
pub mod nominatim_geocoder;
pub mod qr_renderer;

pub use cloudinary_assets::*;
pub use firebase_identity::*;
pub use nominatim_geocoder::*;
pub use qr_renderer::*;
