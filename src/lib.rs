// Upstream promoter windows for CDS starts on circular genomes.
//
// registry indexes genomes by name, coords turns coordinate headers into
// records, window cuts the window (wrapping around the origin when needed)
// and batch ties them together over a whole coordinate file.

pub mod batch;
pub mod coords;
pub mod registry;
pub mod window;
