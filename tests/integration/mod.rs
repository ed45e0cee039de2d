// Integration tests harness
mod codec {
    include!("codec.rs");
}
mod components {
    include!("components.rs");
}
mod blocks {
    include!("blocks.rs");
}
mod project {
    include!("project.rs");
}
