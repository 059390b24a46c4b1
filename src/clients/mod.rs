pub mod osascript;
