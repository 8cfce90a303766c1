//! Hook registry that plugs runtime hooks into the turn engine.

use std::sync::Arc;

use realm_core::{
    EntityId, ErrorSeverity, ParseError, RealmError, TurnEngine, TurnError, TurnHooks, World,
};
use tracing::{debug, error, info};

use super::{ConsistencyHook, HookCriticality, HookPhase, StandingOrderHook, TurnHook};

/// Ordered set of turn hooks.
#[derive(Clone)]
pub struct HookRegistry {
    hooks: Arc<[Arc<dyn TurnHook>]>,
}

impl HookRegistry {
    /// Creates a registry; hooks are sorted by phase, then priority.
    pub fn new(mut hooks: Vec<Arc<dyn TurnHook>>) -> Self {
        hooks.sort_by_key(|h| (h.phase(), h.priority()));
        Self {
            hooks: hooks.into(),
        }
    }

    /// Consistency check plus `guard` as the standing order for unowned
    /// characters.
    pub fn default_hooks() -> Self {
        Self::new(vec![
            Arc::new(ConsistencyHook) as Arc<dyn TurnHook>,
            Arc::new(StandingOrderHook::default()) as Arc<dyn TurnHook>,
        ])
    }

    /// A registry with no hooks at all.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Returns a registry with `hook` added.
    pub fn with(self, hook: Arc<dyn TurnHook>) -> Self {
        let mut hooks = self.hooks.to_vec();
        hooks.push(hook);
        Self::new(hooks)
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Hook names with their phase, in execution order (for debugging).
    pub fn hooks(&self) -> impl Iterator<Item = (&'static str, HookPhase)> + '_ {
        self.hooks.iter().map(|h| (h.name(), h.phase()))
    }

    /// Runs every hook registered for `phase`.
    pub fn run_phase(&self, phase: HookPhase, engine: &mut TurnEngine<'_>) -> Result<(), TurnError> {
        for hook in self.hooks.iter().filter(|h| h.phase() == phase) {
            if let Err(e) = hook.run(engine) {
                Self::handle_hook_error(hook.as_ref(), e)?;
            }
        }
        Ok(())
    }

    /// Fatal errors propagate unchanged and critical hooks wrap theirs in
    /// [`TurnError::HookFailed`]. Other errors that abort the turn propagate
    /// as well; only recoverable ones are logged by criticality.
    fn handle_hook_error(hook: &dyn TurnHook, error: TurnError) -> Result<(), TurnError> {
        let severity = error.severity();
        if severity == ErrorSeverity::Fatal {
            error!(
                target: "runtime::hooks",
                hook = hook.name(),
                code = error.error_code(),
                %error,
                "Hook hit corrupted state, aborting turn"
            );
            return Err(error);
        }

        match (hook.criticality(), severity.aborts_turn()) {
            (HookCriticality::Critical, _) => {
                error!(
                    target: "runtime::hooks",
                    hook = hook.name(),
                    criticality = "critical",
                    %error,
                    "Critical hook failed, aborting turn"
                );
                Err(TurnError::HookFailed {
                    hook: hook.name().to_string(),
                    reason: error.to_string(),
                })
            }
            (_, true) => {
                error!(
                    target: "runtime::hooks",
                    hook = hook.name(),
                    code = error.error_code(),
                    ?severity,
                    %error,
                    "Hook failed, aborting turn"
                );
                Err(error)
            }
            (HookCriticality::Important, false) => {
                error!(
                    target: "runtime::hooks",
                    hook = hook.name(),
                    criticality = "important",
                    %error,
                    "Hook failed, continuing"
                );
                Ok(())
            }
            (HookCriticality::Optional, false) => {
                debug!(
                    target: "runtime::hooks",
                    hook = hook.name(),
                    criticality = "optional",
                    %error,
                    "Optional hook failed"
                );
                Ok(())
            }
        }
    }
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::default_hooks()
    }
}

impl TurnHooks for HookRegistry {
    fn check_consistency(&self, engine: &mut TurnEngine<'_>) -> Result<(), TurnError> {
        self.run_phase(HookPhase::Consistency, engine)
    }

    fn inject_standing_orders(&self, engine: &mut TurnEngine<'_>) -> Result<(), TurnError> {
        self.run_phase(HookPhase::StandingOrders, engine)
    }

    fn notify_watchers(&self, engine: &mut TurnEngine<'_>) -> Result<(), TurnError> {
        self.run_phase(HookPhase::Watchers, engine)
    }

    fn requeue_interrupted(&self, engine: &mut TurnEngine<'_>) -> Result<(), TurnError> {
        self.run_phase(HookPhase::Requeue, engine)
    }

    fn player_standing_orders(&self, engine: &mut TurnEngine<'_>) -> Result<(), TurnError> {
        self.run_phase(HookPhase::PlayerStandingOrders, engine)
    }

    fn match_trades(&self, engine: &mut TurnEngine<'_>) -> Result<(), TurnError> {
        self.run_phase(HookPhase::Trades, engine)
    }

    fn check_engagements(&self, engine: &mut TurnEngine<'_>) -> Result<(), TurnError> {
        self.run_phase(HookPhase::Engagement, engine)
    }

    fn report_failure(&self, world: &World, actor: EntityId, text: &str, error: &ParseError) {
        let owner = world.owner_of(actor).ok();
        info!(
            target: "runtime::orders",
            %actor,
            owner = ?owner,
            order = text,
            code = error.error_code(),
            %error,
            "order rejected"
        );
    }
}
