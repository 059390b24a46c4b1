//! Tool and resource handlers plus the AppleScript they run.

pub mod applescript;
pub mod contacts;
pub mod imessage;
