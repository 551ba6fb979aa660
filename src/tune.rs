/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Divisor for computing the soft timeout of a search.
macro_rules! soft_timeout_divisor {
    () => {
        20
    };
}
pub(crate) use soft_timeout_divisor;

/// Divisor for computing the hard timeout of a search.
macro_rules! hard_timeout_divisor {
    () => {
        5
    };
}
pub(crate) use hard_timeout_divisor;

/// Divisor for computing how much of the time increment to use.
macro_rules! time_inc_divisor {
    () => {
        2
    };
}
pub(crate) use time_inc_divisor;

/// Depth of a full search at the hardest difficulty.
macro_rules! hard_depth {
    () => {
        3
    };
}
pub(crate) use hard_depth;

/// Depth used to score each root move at medium difficulty.
macro_rules! medium_depth {
    () => {
        2
    };
}
pub(crate) use medium_depth;

/// Number of best root moves a medium search picks from.
macro_rules! medium_candidates {
    () => {
        3
    };
}
pub(crate) use medium_candidates;

/// Depth used to score each root move at easy difficulty.
macro_rules! easy_depth {
    () => {
        1
    };
}
pub(crate) use easy_depth;

/// Number of best root moves an easy search picks from.
macro_rules! easy_candidates {
    () => {
        5
    };
}
pub(crate) use easy_candidates;
