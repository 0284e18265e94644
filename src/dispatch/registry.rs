// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Process-wide table of async operations awaiting their completion callback.
//!
//! The engine calls back with nothing but the result buffer, so the callback
//! itself has to say which operation finished. Each slot in the table owns a
//! distinct `extern "C"` trampoline; an operation claims a free slot and hands
//! that slot's trampoline to `run_command_async`.
//!
//! A slot is vacated when its callback fires, or when the operation is
//! aborted and the engine will no longer call back. Claims start from a
//! rotating cursor, so a vacated slot is the last one to be handed out again.

use crate::dispatch::operation::Operation;
use crate::traits::engine::OnCompletedFn;
use std::ffi::c_char;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Async commands that can await completion at the same time.
pub(crate) const SLOT_COUNT: usize = 256;

type Slot = Mutex<Option<Arc<Operation>>>;

#[allow(clippy::declare_interior_mutable_const)]
const VACANT: Slot = Mutex::new(None);

static SLOTS: [Slot; SLOT_COUNT] = [VACANT; SLOT_COUNT];
static CURSOR: AtomicUsize = AtomicUsize::new(0);
static NEXT_ID: AtomicUsize = AtomicUsize::new(1);

unsafe extern "C" fn trampoline<const SLOT: usize>(result: *const c_char) {
    super::pending::on_completed(SLOT, result);
}

macro_rules! trampolines {
    ($($slot:literal)*) => {
        [$(trampoline::<{ $slot }> as OnCompletedFn),*]
    };
}

static TRAMPOLINES: [OnCompletedFn; SLOT_COUNT] = trampolines!(
    0 1 2 3 4 5 6 7 8 9 10 11 12 13 14 15
    16 17 18 19 20 21 22 23 24 25 26 27 28 29 30 31
    32 33 34 35 36 37 38 39 40 41 42 43 44 45 46 47
    48 49 50 51 52 53 54 55 56 57 58 59 60 61 62 63
    64 65 66 67 68 69 70 71 72 73 74 75 76 77 78 79
    80 81 82 83 84 85 86 87 88 89 90 91 92 93 94 95
    96 97 98 99 100 101 102 103 104 105 106 107 108 109 110 111
    112 113 114 115 116 117 118 119 120 121 122 123 124 125 126 127
    128 129 130 131 132 133 134 135 136 137 138 139 140 141 142 143
    144 145 146 147 148 149 150 151 152 153 154 155 156 157 158 159
    160 161 162 163 164 165 166 167 168 169 170 171 172 173 174 175
    176 177 178 179 180 181 182 183 184 185 186 187 188 189 190 191
    192 193 194 195 196 197 198 199 200 201 202 203 204 205 206 207
    208 209 210 211 212 213 214 215 216 217 218 219 220 221 222 223
    224 225 226 227 228 229 230 231 232 233 234 235 236 237 238 239
    240 241 242 243 244 245 246 247 248 249 250 251 252 253 254 255
);

/// A claimed slot and the callback that reports into it.
pub(crate) struct Route {
    pub slot: usize,
    pub callback: OnCompletedFn,
}

fn lock(slot: &Slot) -> MutexGuard<'_, Option<Arc<Operation>>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn next_id() -> usize {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

/// Park `op` in a free slot. Returns `None` when every slot is taken.
pub(crate) fn claim(op: &Arc<Operation>) -> Option<Route> {
    let start = CURSOR.fetch_add(1, Ordering::Relaxed);
    (0..SLOT_COUNT)
        .map(|offset| start.wrapping_add(offset) % SLOT_COUNT)
        .find_map(|slot| {
            let mut entry = lock(&SLOTS[slot]);
            if entry.is_some() {
                return None;
            }
            *entry = Some(Arc::clone(op));
            Some(Route {
                slot,
                callback: TRAMPOLINES[slot],
            })
        })
}

/// Remove and return whatever operation occupies `slot`.
pub(crate) fn take(slot: usize) -> Option<Arc<Operation>> {
    SLOTS.get(slot).and_then(|entry| lock(entry).take())
}

/// Empty `slot` if `op` still occupies it.
pub(crate) fn vacate(slot: usize, op: &Operation) {
    if let Some(entry) = SLOTS.get(slot) {
        let mut entry = lock(entry);
        if entry
            .as_ref()
            .is_some_and(|held| std::ptr::eq(Arc::as_ptr(held), op))
        {
            *entry = None;
        }
    }
}

#[cfg(test)]
pub(crate) fn occupant(slot: usize) -> Option<usize> {
    SLOTS
        .get(slot)
        .and_then(|entry| lock(entry).as_ref().map(|op| op.id()))
}
