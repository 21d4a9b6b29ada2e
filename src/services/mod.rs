pub mod geojson_export;
pub mod route_features;
pub mod route_generator;
