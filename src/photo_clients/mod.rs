pub mod unsplash;
