// Visitor workflow exports
pub mod engagement;
pub mod form;
pub mod funnel;
pub mod result_view;
pub mod routing;
pub mod tarot;
pub mod timeline;

pub use engagement::{EngagementAction, EngagementPlayer, EngagementScript, EngagementSequence, EngagementState, Screen, TransitionPhase};
pub use form::{FieldErrors, FormController, FormError, FormField, FormStep};
pub use funnel::{FunnelError, FunnelSession, FunnelStage, Navigation};
pub use result_view::{legacy_share_url, load_result, share_url, ResultView};
pub use routing::{resolve, ClientRoute, Resolution};
pub use tarot::{CardSpread, SpreadError, TarotCard, Toggle, TAROT_CATALOG};
pub use timeline::{Cue, Scheduler, Timeline, TimelineRun};
