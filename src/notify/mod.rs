pub mod pushbullet;

pub use pushbullet::{notify_all, PushTransport, PushbulletClient};
