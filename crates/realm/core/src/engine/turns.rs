//! Turn and day driver plus the tiered drain.

use super::{CommandEventKind, TurnEngine, TurnError, TurnReport};
use crate::command::{CommandState, Priority};
use crate::state::EntityId;

/// Turn scheduling methods for TurnEngine.
impl TurnEngine<'_> {
    /// Runs a whole turn: setup, `month_days` days, teardown.
    pub fn process_orders(mut self, turn: u32) -> Result<TurnReport, TurnError> {
        self.begin_turn(turn)?;
        for _ in 0..self.world.config.month_days {
            self.run_day()?;
        }
        Ok(self.finish_turn())
    }

    /// Resets per-turn scheduler state, gives every actor a command record,
    /// loads idle actors and runs the setup hooks.
    pub fn begin_turn(&mut self, turn: u32) -> Result<(), TurnError> {
        self.world.calendar.begin_turn(turn);
        self.world.scheduler.reset();
        self.report = TurnReport::new(turn);
        tracing::debug!(target: "realm::scheduler", turn, "begin turn");

        let hooks = self.env.hooks;
        hooks.check_consistency(self)?;

        for actor in self.world.actors() {
            let command = self.world.ensure_command(actor)?;
            match command.state {
                CommandState::Idle => self.load_next(actor)?,
                CommandState::Queued => {
                    let priority = command.priority;
                    self.world.scheduler.enqueue(actor, priority);
                }
                CommandState::Active => {
                    command.started_today = false;
                    self.world.scheduler.activate(actor);
                }
                CommandState::Failed => {
                    command.reset_to_idle();
                    self.load_next(actor)?;
                }
            }
        }

        hooks.inject_standing_orders(self)?;
        self.drain_pending_loads()?;
        hooks.notify_watchers(self)?;
        self.drain_pending_loads()?;
        hooks.requeue_interrupted(self)?;
        self.drain_pending_loads()?;
        hooks.player_standing_orders(self)?;
        self.drain_pending_loads()
    }

    /// Advances the calendar one day, drains every tier, then steps every
    /// running command. Returns the new day number.
    pub fn run_day(&mut self) -> Result<u32, TurnError> {
        let day = self.world.calendar.advance_day();
        let daily_check = self.world.config.daily_engagement_check;
        let scheduler = &mut self.world.scheduler;
        scheduler.engagement_checked = false;
        if daily_check {
            scheduler.engagement_pending = true;
        }

        if day == 1 {
            let hooks = self.env.hooks;
            hooks.match_trades(self)?;
            self.drain_pending_loads()?;
        }

        self.drain_all_tiers()?;
        self.step_all_active()?;
        Ok(day)
    }

    /// Marks the turn's days processed and hands back the report.
    pub fn finish_turn(self) -> TurnReport {
        self.world.calendar.days_complete = true;
        tracing::debug!(
            target: "realm::scheduler",
            turn = self.report.turn,
            events = self.report.events.len(),
            "turn complete"
        );
        self.report
    }

    /// True if the actor may be selected from `tier` right now.
    pub fn is_ready(&self, actor: EntityId, tier: Priority) -> Result<bool, TurnError> {
        let Some(entity) = self.world.entities.get(actor) else {
            return Ok(false);
        };
        let Some(command) = entity.command.as_ref() else {
            return Ok(false);
        };
        if command.state != CommandState::Queued
            || command.priority != tier
            || command.extra_delay > 0
            || entity.is_prisoner()
        {
            return Ok(false);
        }
        Ok(!self.world.in_transit(actor)?)
    }

    /// Most urgent tier holding at least one ready actor.
    pub fn select_next_tier(&self) -> Result<Option<Priority>, TurnError> {
        self.first_ready_tier(Priority::all())
    }

    fn first_ready_tier(
        &self,
        tiers: impl Iterator<Item = Priority>,
    ) -> Result<Option<Priority>, TurnError> {
        for tier in tiers {
            for &actor in self.world.scheduler.bin(tier) {
                if self.is_ready(actor, tier)? {
                    return Ok(Some(tier));
                }
            }
        }
        Ok(None)
    }

    /// Drains tiers until none has a ready actor.
    pub fn drain_all_tiers(&mut self) -> Result<(), TurnError> {
        while let Some(tier) = self.select_next_tier()? {
            self.drain_tier(tier)?;
        }
        self.world.scheduler.set_cursor(None);
        Ok(())
    }

    /// Dispatches the ready actors of one tier in ascending ID order.
    ///
    /// Membership is snapshotted up front; actors queued during the drain
    /// wait for the next pass. Stops early when a more urgent tier becomes
    /// ready.
    pub fn drain_tier(&mut self, tier: Priority) -> Result<(), TurnError> {
        self.world.scheduler.set_cursor(Some(tier));

        if self.engagement_due(tier) {
            self.world.scheduler.engagement_pending = false;
            self.world.scheduler.engagement_checked = true;
            self.record(None, CommandEventKind::EngagementCheck);
            let hooks = self.env.hooks;
            hooks.check_engagements(self)?;
            self.drain_pending_loads()?;
            if self.preempted(tier)? {
                return Ok(());
            }
        }

        let snapshot: Vec<EntityId> = self.world.scheduler.bin(tier).iter().copied().collect();
        for actor in snapshot {
            if !self.is_ready(actor, tier)? {
                continue;
            }
            self.dispatch(actor)?;
            self.drain_pending_loads()?;
            if self.preempted(tier)? {
                break;
            }
        }
        Ok(())
    }

    fn engagement_due(&self, tier: Priority) -> bool {
        let scheduler = &self.world.scheduler;
        tier.get() >= self.world.config.engagement_tier
            && scheduler.engagement_pending
            && !scheduler.engagement_checked
    }

    /// Lowers the cursor if a more urgent tier has become ready and reports
    /// whether draining of `tier` must stop.
    fn preempted(&mut self, tier: Priority) -> Result<bool, TurnError> {
        let urgent = Priority::all().take_while(|p| *p < tier);
        if let Some(next) = self.first_ready_tier(urgent)? {
            self.world.scheduler.preempt(next);
        }
        match self.world.scheduler.cursor() {
            Some(cursor) if cursor == tier => Ok(false),
            Some(cursor) => {
                tracing::debug!(target: "realm::scheduler", from = %tier, to = %cursor, "preempted");
                self.record(
                    None,
                    CommandEventKind::Preempted {
                        from: tier,
                        to: cursor,
                    },
                );
                Ok(true)
            }
            None => Ok(true),
        }
    }

    /// Ages queued delays, then steps every running command once.
    ///
    /// Both the running set and each actor's transit state are snapshotted
    /// first, so commands queued by a completion wait for tomorrow and a
    /// follower stays frozen for the whole day its leader stops.
    pub fn step_all_active(&mut self) -> Result<(), TurnError> {
        self.age_queued_delays();

        let running: Vec<EntityId> = self.world.scheduler.running().iter().copied().collect();
        let mut snapshot = Vec::with_capacity(running.len());
        for actor in running {
            snapshot.push((actor, self.world.in_transit(actor)?));
        }

        for (actor, frozen) in snapshot {
            self.step_day(actor, frozen)?;
            self.drain_pending_loads()?;
        }
        Ok(())
    }

    fn age_queued_delays(&mut self) {
        let queued: Vec<EntityId> = Priority::all()
            .flat_map(|tier| self.world.scheduler.bin(tier).iter().copied())
            .collect();
        for actor in queued {
            if let Some(command) = self.world.command_mut(actor) {
                if command.state == CommandState::Queued && command.extra_delay > 0 {
                    command.extra_delay -= 1;
                }
            }
        }
    }
}
