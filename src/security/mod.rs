mod namespace;


pub use namespace::NamespaceSanitizer;
