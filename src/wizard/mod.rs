pub mod machine;

pub use machine::{
    GeocodeResolution, GeocodeRole, GeocodeTicket, Phase, RangeCheck, VertexPick, WizardError,
    WizardSession,
};
