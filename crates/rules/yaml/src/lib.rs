mod frontend;

pub use frontend::YamlFrontend;
