pub mod checksum;
pub mod chunked;
pub mod errors;
pub mod framing;
pub mod mixing;
pub mod small;
pub mod varint;

