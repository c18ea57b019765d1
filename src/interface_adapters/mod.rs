// Interface adapters: wire protocol, network clients, local input and status output.

pub mod clients;
pub mod http;
pub mod input;
pub mod net;
pub mod protocol;
pub mod state;
pub mod status;
