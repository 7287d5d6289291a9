//! Gateways to external services. Each gateway owns its HTTP client and
//! translates transport failures into domain errors at the boundary.

pub mod google_oauth;
