//! Output generation - sitemap documents.

pub mod sitemap;
