pub mod geojson_io;
