pub mod nominatim;

pub use nominatim::{AddressQuery, Geocoder, NominatimGeocoder};
