/// Merged component lookup command.
pub mod component;
/// Decoded export dump command.
pub mod dump;
/// Summary and table listing command.
pub mod info;
pub(crate) mod util;
