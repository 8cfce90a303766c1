//! Start-of-turn consistency check and stack repair.

use realm_content::StackRepair;
use realm_core::{TurnEngine, TurnError};

use super::{HookCriticality, HookPhase, TurnHook};

/// Verifies the entity chains and repairs stacking before scheduling starts.
pub struct ConsistencyHook;

impl TurnHook for ConsistencyHook {
    fn name(&self) -> &'static str {
        "consistency"
    }

    fn phase(&self) -> HookPhase {
        HookPhase::Consistency
    }

    fn priority(&self) -> i32 {
        -100
    }

    fn criticality(&self) -> HookCriticality {
        HookCriticality::Critical
    }

    fn run(&self, engine: &mut TurnEngine<'_>) -> Result<(), TurnError> {
        engine.world().entities.verify_chains()?;
        StackRepair::run(engine.world_mut())?;
        Ok(())
    }
}
