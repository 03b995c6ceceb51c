// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Numeric record identifiers.
//!
//! Every persisted record is keyed by a `u64` allocated sequentially by the
//! store. The value `0` is reserved as "none": a job whose `task_id` is
//! zero is unclaimed, a runner whose `repo_id` is zero is not repo-scoped.

/// Define a newtype ID wrapper around `u64`.
///
/// Generates `new()`, `get()`, `is_none()`, the `NONE` sentinel, a `KIND`
/// label used in error messages, `Display`, `FromStr` and `From<u64>`.
///
/// ```ignore
/// define_id! {
///     /// Doc comment for the ID type.
///     pub struct TaskId("task");
/// }
/// ```
#[macro_export]
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        pub struct $name:ident($kind:literal);
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash,
            serde::Serialize, serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Record kind, used in not-found errors and log fields.
            pub const KIND: &'static str = $kind;

            /// The unassigned sentinel.
            pub const NONE: Self = Self(0);

            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            pub const fn get(self) -> u64 {
                self.0
            }

            /// Returns true for the zero sentinel.
            pub const fn is_none(self) -> bool {
                self.0 == 0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse::<u64>().map(Self)
            }
        }
    };
}

define_id! {
    /// A registered runner agent.
    pub struct RunnerId("runner");
}

define_id! {
    /// One workflow run (a group of jobs created together).
    pub struct RunId("run");
}

define_id! {
    /// A schedulable job within a run.
    pub struct JobId("job");
}

define_id! {
    /// One execution attempt of a job.
    pub struct TaskId("task");
}

define_id! {
    /// A scheduled workflow.
    pub struct ScheduleId("schedule");
}

define_id! {
    /// One cron spec row belonging to a schedule.
    pub struct SpecId("spec");
}

define_id! {
    /// Account that owns repositories; zero means "no owner scope".
    pub struct OwnerId("owner");
}

define_id! {
    /// Repository; zero means "no repository scope".
    pub struct RepoId("repo");
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
