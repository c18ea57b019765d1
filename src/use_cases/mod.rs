// Use cases layer: session bookkeeping, the match loop, and room preparation.

pub mod countdown;
pub mod game;
pub mod room;
pub mod store;
pub mod types;

pub use game::{GameLoop, LoopSettings};
pub use room::{NewRoom, RoomDetails, RoomDirectory, RoomError, RoomTarget, prepare_room};
pub use store::{Listener, ListenerId, LiveSessionStore, NullSessionStore, SessionStore};
pub use types::{CountdownCue, REDIRECT_TO_RESULT_EVENT, ShellSignal};
