//! Command state transitions: load, dispatch, daily step, completion and
//! forced cancellation.

use super::{CommandEventKind, TurnEngine, TurnError};
use crate::command::{ActionSpec, Command, CommandState, Outcome, ParseError, ParsedOrder};
use crate::config::RealmConfig;
use crate::state::EntityId;

impl TurnEngine<'_> {
    /// Pops the actor's next order and queues it.
    ///
    /// Does nothing unless the command is Idle. Orders that fail to parse are
    /// reported and skipped, so on return the command is either Queued or
    /// Idle with an empty order queue.
    pub fn load_next(&mut self, actor: EntityId) -> Result<(), TurnError> {
        let owner = self.world.owner_of(actor)?;
        if !self.world.ensure_command(actor)?.is_idle() {
            return Ok(());
        }

        while let Some(text) = self.world.orders.pop(owner, actor) {
            match self.parse(actor, &text) {
                Ok((parsed, spec)) => return self.queue_parsed(actor, text, parsed, &spec),
                Err(error) => self.fail_parse(actor, text, error)?,
            }
        }
        Ok(())
    }

    fn parse(&self, actor: EntityId, text: &str) -> Result<(ParsedOrder, ActionSpec), ParseError> {
        let parsed = self.env.parser.parse(self.world, actor, text)?;
        let spec = self
            .env
            .handlers
            .spec(parsed.code)
            .copied()
            .ok_or(ParseError::UnregisteredAction {
                code: parsed.code.0,
            })?;
        Ok((parsed, spec))
    }

    fn queue_parsed(
        &mut self,
        actor: EntityId,
        text: String,
        parsed: ParsedOrder,
        spec: &ActionSpec,
    ) -> Result<(), TurnError> {
        let command = self.world.ensure_command(actor)?;
        command.state = CommandState::Queued;
        command.action = Some(spec.code);
        command.priority = spec.priority;
        command.wait = spec.duration;
        command.poll = spec.poll;
        command.operands = parsed.operands;
        command.text = text;
        command.days_executing = 0;
        command.outcome = Outcome::Success;
        command.inhibit_finish = false;
        command.started_today = false;

        self.world.scheduler.enqueue(actor, spec.priority);
        tracing::trace!(target: "realm::scheduler", %actor, verb = spec.verb, priority = %spec.priority, "queued");
        self.record(
            Some(actor),
            CommandEventKind::Queued {
                priority: spec.priority,
            },
        );
        Ok(())
    }

    /// Failed → reported → Idle, all within the load attempt.
    fn fail_parse(&mut self, actor: EntityId, text: String, error: ParseError) -> Result<(), TurnError> {
        let command = self.world.ensure_command(actor)?;
        command.state = CommandState::Failed;
        command.text.clone_from(&text);
        command.outcome = Outcome::Failure;

        tracing::debug!(target: "realm::scheduler", %actor, order = %text, %error, "order rejected");
        self.env.hooks.report_failure(self.world, actor, &text, &error);
        self.record(
            Some(actor),
            CommandEventKind::ParseFailed {
                text,
                reason: error.to_string(),
            },
        );

        let command = self.world.ensure_command(actor)?;
        command.previous_outcome = Some(Outcome::Failure);
        command.reset_to_idle();
        Ok(())
    }

    /// Queued → Active, then runs the start routine.
    ///
    /// Commands with no wait and no polling finish in the same dispatch.
    pub(crate) fn dispatch(&mut self, actor: EntityId) -> Result<(), TurnError> {
        let command = self
            .world
            .command_mut(actor)
            .ok_or(TurnError::NoCommand { id: actor })?;
        command.state = CommandState::Active;
        command.days_executing = 0;
        command.inhibit_finish = false;
        command.outcome = Outcome::Success;
        command.started_today = true;
        let code = command.action;

        self.world.scheduler.activate(actor);
        tracing::debug!(target: "realm::scheduler", %actor, day = self.world.calendar.day, "dispatch");
        self.record(Some(actor), CommandEventKind::Started);

        let Some(spec) = code.and_then(|code| self.env.handlers.spec(code).copied()) else {
            self.fail(actor);
            return self.complete(actor);
        };

        if let Some(start) = spec.start {
            if !self.run_routine(actor, start) {
                self.fail(actor);
            }
        }

        let Some(command) = self.active_command(actor) else {
            return Ok(());
        };
        let failed = command.outcome == Outcome::Failure;
        let instant = command.wait <= 0 && !command.poll;
        if failed {
            self.complete(actor)
        } else if instant {
            self.run_finish(actor, &spec)
        } else {
            Ok(())
        }
    }

    /// Advances an Active command by one day.
    ///
    /// `frozen` marks a follower whose stack is in transit: the step is a
    /// complete no-op for it.
    pub(crate) fn step_day(&mut self, actor: EntityId, frozen: bool) -> Result<(), TurnError> {
        let Some(command) = self.world.command_mut(actor) else {
            return Ok(());
        };
        if command.state != CommandState::Active {
            return Ok(());
        }
        if command.started_today {
            command.started_today = false;
            return Ok(());
        }
        if frozen {
            return Ok(());
        }
        if command.extra_delay > 0 {
            command.extra_delay -= 1;
            return Ok(());
        }

        command.days_executing += 1;
        if command.wait > 0 {
            command.wait -= 1;
        }
        if command.wait > 0 && !command.poll {
            return Ok(());
        }

        let code = command.action;
        match code.and_then(|code| self.env.handlers.spec(code).copied()) {
            Some(spec) => self.run_finish(actor, &spec),
            None => {
                self.fail(actor);
                self.complete(actor)
            }
        }
    }

    /// Runs the finish routine unless inhibited, then completes the command
    /// if it failed or its wait has run out.
    fn run_finish(&mut self, actor: EntityId, spec: &ActionSpec) -> Result<(), TurnError> {
        let inhibited = self
            .active_command(actor)
            .is_none_or(|command| command.inhibit_finish);
        if !inhibited {
            if let Some(finish) = spec.finish {
                if !self.run_routine(actor, finish) {
                    self.fail(actor);
                }
            }
        }

        let done = match self.active_command(actor) {
            Some(command) => command.outcome == Outcome::Failure || command.wait <= 0,
            None => return Ok(()),
        };
        if done {
            self.complete(actor)
        } else {
            Ok(())
        }
    }

    /// Active → Idle, then loads the actor's next order.
    fn complete(&mut self, actor: EntityId) -> Result<(), TurnError> {
        self.world.scheduler.remove(actor);
        let command = self
            .world
            .command_mut(actor)
            .ok_or(TurnError::NoCommand { id: actor })?;
        let outcome = command.outcome;
        let days = command.days_executing;
        command.previous_outcome = Some(outcome);
        command.reset_to_idle();

        tracing::debug!(target: "realm::scheduler", %actor, ?outcome, days, "completed");
        self.record(Some(actor), CommandEventKind::Completed { outcome, days });
        self.load_next(actor)
    }

    /// Cancels a Queued or Active command from outside.
    ///
    /// Runs the interrupt routine of an Active command, forces failure and
    /// leaves the actor Idle without loading its next order. Returns false if
    /// there was nothing to cancel.
    pub fn interrupt(&mut self, actor: EntityId) -> Result<bool, TurnError> {
        let Some(command) = self.world.command(actor) else {
            return Ok(false);
        };
        let was_active = match command.state {
            CommandState::Active => true,
            CommandState::Queued => false,
            CommandState::Idle | CommandState::Failed => return Ok(false),
        };

        if was_active {
            let routine = command
                .action
                .and_then(|code| self.env.handlers.spec(code))
                .and_then(|spec| spec.interrupt);
            if let Some(routine) = routine {
                self.run_routine(actor, routine);
            }
        }

        self.world.scheduler.remove(actor);
        if let Some(command) = self.world.command_mut(actor) {
            command.outcome = Outcome::Failure;
            command.previous_outcome = Some(Outcome::Failure);
            command.reset_to_idle();
        }
        tracing::debug!(target: "realm::scheduler", %actor, was_active, "interrupted");
        self.record(Some(actor), CommandEventKind::Interrupted);
        Ok(true)
    }

    /// Pushes a stop order to the front of the actor's queue, cancels the
    /// current command and loads the stop.
    pub fn force_stop(&mut self, actor: EntityId) -> Result<(), TurnError> {
        let owner = self.world.owner_of(actor)?;
        self.world
            .orders
            .push_front(owner, actor, RealmConfig::STOP_ORDER);
        self.interrupt(actor)?;
        self.load_next(actor)
    }

    /// Loads every actor a routine or hook asked to reload.
    pub(crate) fn drain_pending_loads(&mut self) -> Result<(), TurnError> {
        loop {
            let pending = self.world.scheduler.take_pending_loads();
            if pending.is_empty() {
                return Ok(());
            }
            for actor in pending {
                let can_act = self
                    .world
                    .entities
                    .get(actor)
                    .is_some_and(|entity| entity.kind().can_act());
                if can_act {
                    self.load_next(actor)?;
                }
            }
        }
    }

    fn active_command(&self, actor: EntityId) -> Option<&Command> {
        self.world
            .command(actor)
            .filter(|command| command.state == CommandState::Active)
    }

    fn fail(&mut self, actor: EntityId) {
        if let Some(command) = self.world.command_mut(actor) {
            command.outcome = Outcome::Failure;
        }
    }
}
