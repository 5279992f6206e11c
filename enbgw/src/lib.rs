mod data;
mod gateway;
mod session;
mod userplane;
mod x2;

use session::SessionManager;

pub use data::{BearerId, BearerQos, Config, FlowKey, Imsi, Rnti, X2Link, load_topology_file};
pub use gateway::{EnbGateway, RadioBearerSetupRequest, RadioControlSap};
pub use session::SessionError;
pub use userplane::{BearerFrame, FrameError};
pub use x2::{StationId, StationPair, X2Error, X2Handler, X2Registry};
