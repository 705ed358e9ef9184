//! Sequential statement runner with per-statement scopes and retries

use std::time::Instant;

use tracing::{Span, debug, error, info, info_span, warn};

use super::connection::{DbError, ErrorClass, SqlConnection};
use super::error::ExecutionHalted;
use super::outcome::{ExecutionOutcome, OutcomeStatus, RunReport};
use super::policy::{RetryPolicy, Sleeper, ThreadSleeper};
use crate::script::Statement;

/// Replays statements one by one on a single connection
///
/// Every statement runs in its own transaction scope, so a failure never
/// undoes statements that already committed.
pub struct ResilientExecutor<'a, C: SqlConnection + ?Sized, S: Sleeper = ThreadSleeper> {
    conn: &'a mut C,
    policy: RetryPolicy,
    sleeper: S,
    span: Option<Span>,
}

impl<'a, C: SqlConnection + ?Sized> ResilientExecutor<'a, C, ThreadSleeper> {
    pub fn new(conn: &'a mut C, policy: RetryPolicy) -> Self {
        Self {
            conn,
            policy,
            sleeper: ThreadSleeper,
            span: None,
        }
    }
}

impl<'a, C: SqlConnection + ?Sized, S: Sleeper> ResilientExecutor<'a, C, S> {
    /// Replace the delay implementation
    pub fn with_sleeper<T: Sleeper>(self, sleeper: T) -> ResilientExecutor<'a, C, T> {
        ResilientExecutor {
            conn: self.conn,
            policy: self.policy,
            sleeper,
            span: self.span,
        }
    }

    /// Parent span for the run's log records
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn sleeper(&self) -> &S {
        &self.sleeper
    }

    /// Run statements in order under a fresh report
    pub fn run<I>(&mut self, statements: I) -> Result<RunReport, ExecutionHalted>
    where
        I: IntoIterator<Item = Statement>,
    {
        self.run_into(RunReport::new(), statements)
    }

    /// Run statements in order, appending outcomes to `report`
    ///
    /// Returns `Err` as soon as one statement fails fatally; the statements
    /// after it are never attempted.
    pub fn run_into<I>(
        &mut self,
        mut report: RunReport,
        statements: I,
    ) -> Result<RunReport, ExecutionHalted>
    where
        I: IntoIterator<Item = Statement>,
    {
        let _parent = self.span.clone().map(Span::entered);
        let _span = info_span!(
            "script_run",
            run_id = %report.run_id,
            max_attempts = self.policy.max_attempts
        )
        .entered();

        info!(run_id = %report.run_id, "Starting script run");

        for (index, statement) in statements.into_iter().enumerate() {
            let started = Instant::now();
            let mut outcome = ExecutionOutcome::for_statement(index, &statement);

            loop {
                outcome.attempts += 1;
                debug!(
                    index,
                    line = statement.line,
                    attempt = outcome.attempts,
                    statement = %outcome.preview,
                    "Executing statement"
                );

                let err = match self.attempt(&statement) {
                    Ok(()) => {
                        outcome.status = OutcomeStatus::Committed;
                        outcome.last_error = None;
                        outcome.error_code = None;
                        break;
                    }
                    Err(err) => err,
                };

                // Postgres leaves the scope aborted after any error
                self.rollback_quietly(&statement);
                outcome.last_error = Some(err.message.clone());
                outcome.error_code = err.code.clone();

                let class = err.class;
                match class {
                    ErrorClass::IdempotentConflict => {
                        info!(
                            index,
                            line = statement.line,
                            error = %err,
                            "Object already exists, skipping statement"
                        );
                        outcome.status = OutcomeStatus::SkippedIdempotent;
                        break;
                    }
                    ErrorClass::Transient if outcome.attempts < self.policy.max_attempts => {
                        warn!(
                            index,
                            line = statement.line,
                            attempt = outcome.attempts,
                            max_attempts = self.policy.max_attempts,
                            delay_ms = self.policy.delay.as_millis() as u64,
                            error = %err,
                            "Transient error, retrying statement"
                        );
                        self.sleeper.sleep(self.policy.delay);
                    }
                    ErrorClass::Transient => {
                        warn!(
                            index,
                            line = statement.line,
                            attempts = outcome.attempts,
                            error = %err,
                            "Retries exhausted, continuing with next statement"
                        );
                        outcome.status = OutcomeStatus::FailedRecoverable;
                        break;
                    }
                    ErrorClass::Fatal => {
                        error!(
                            index,
                            line = statement.line,
                            code = err.code.as_deref().unwrap_or(""),
                            error = %err,
                            "Fatal error, stopping run"
                        );
                        outcome.status = OutcomeStatus::FailedFatal;
                        outcome.duration_ms = elapsed_ms(started);
                        report.push(outcome);
                        report.finish();
                        return Err(ExecutionHalted {
                            report: Box::new(report),
                            index,
                            line: statement.line,
                            error: err,
                        });
                    }
                }
            }

            outcome.duration_ms = elapsed_ms(started);
            report.push(outcome);
        }

        report.finish();
        info!(
            run_id = %report.run_id,
            committed = report.count(OutcomeStatus::Committed),
            skipped = report.count(OutcomeStatus::SkippedIdempotent),
            failed = report.count(OutcomeStatus::FailedRecoverable),
            "Script run finished"
        );
        Ok(report)
    }

    fn attempt(&mut self, statement: &Statement) -> Result<(), DbError> {
        if statement.runs_outside_transaction() {
            return self.conn.execute(&statement.text);
        }
        self.conn.begin()?;
        self.conn.execute(&statement.text)?;
        self.conn.commit()
    }

    fn rollback_quietly(&mut self, statement: &Statement) {
        if statement.runs_outside_transaction() {
            return;
        }
        if let Err(err) = self.conn.rollback() {
            debug!(line = statement.line, error = %err, "Rollback failed");
        }
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
