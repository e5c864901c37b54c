pub(crate) mod health;
pub(crate) mod image;
pub(crate) mod missions;
pub(crate) mod sign;
pub(crate) mod subtitle;
pub(crate) mod tts;
