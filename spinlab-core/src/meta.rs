#[derive(strum_macros::AsRefStr, PartialEq, Eq, Debug, Clone, Copy)]
pub enum ReleaseType {
    Debug,
    Stable,
    Nightly,
}

include!(concat!(env!("OUT_DIR"), "/meta.rs"));
