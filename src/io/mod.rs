/// CSV export of power series and histograms.
pub mod export;
