//! Standard-library header registry
//!
//! Run-scoped deduplication of recognized standard headers: the first
//! `#include <name>` encountered during processing survives, every later
//! occurrence of the same name is dropped. The registry is an explicit
//! context value passed into normalization, so independent runs (and
//! tests) cannot interfere with each other.

use std::collections::HashSet;

/// Standard C++ library headers (through C++26) plus the C compatibility
/// headers they may appear as.
pub const STANDARD_HEADERS: &[&str] = &[
    // C++ library headers
    "algorithm",
    "iomanip",
    "list",
    "ostream",
    "streambuf",
    "bitset",
    "ios",
    "locale",
    "queue",
    "string",
    "complex",
    "iosfwd",
    "map",
    "set",
    "typeinfo",
    "deque",
    "iostream",
    "memory",
    "sstream",
    "utility",
    "exception",
    "istream",
    "new",
    "stack",
    "valarray",
    "fstream",
    "iterator",
    "numeric",
    "stdexcept",
    "vector",
    "functional",
    "limits",
    "array",
    "condition_variable",
    "mutex",
    "scoped_allocator",
    "type_traits",
    "atomic",
    "forward_list",
    "random",
    "system_error",
    "typeindex",
    "chrono",
    "future",
    "ratio",
    "thread",
    "unordered_map",
    "initializer_list",
    "regex",
    "tuple",
    "unordered_set",
    "shared_mutex",
    "any",
    "execution",
    "memory_resource",
    "string_view",
    "variant",
    "charconv",
    "filesystem",
    "optional",
    "barrier",
    "concepts",
    "latch",
    "semaphore",
    "stop_token",
    "bit",
    "coroutine",
    "numbers",
    "source_location",
    "syncstream",
    "compare",
    "format",
    "ranges",
    "span",
    "version",
    "expected",
    "flat_set",
    "mdspan",
    "spanstream",
    "stdfloat",
    "flat_map",
    "generator",
    "print",
    "stacktrace",
    "debugging",
    "inplace_vector",
    "linalg",
    "rcu",
    "text_encoding",
    "hazard_pointer",
    // C headers wrapped for C++
    "cassert",
    "clocale",
    "cstdarg",
    "cstring",
    "cctype",
    "cmath",
    "cstddef",
    "ctime",
    "cerrno",
    "csetjmp",
    "cstdio",
    "cwchar",
    "cfloat",
    "csignal",
    "cstdlib",
    "cwctype",
    "climits",
    "cfenv",
    "cinttypes",
    "cstdint",
    "cuchar",
    // C compatibility headers
    "assert.h",
    "errno.h",
    "fenv.h",
    "float.h",
    "inttypes.h",
    "limits.h",
    "locale.h",
    "math.h",
    "setjmp.h",
    "signal.h",
    "stdarg.h",
    "stddef.h",
    "stdint.h",
    "stdio.h",
    "stdlib.h",
    "string.h",
    "time.h",
    "uchar.h",
    "wchar.h",
    "wctype.h",
    "stdatomic.h",
    "complex.h",
    "tgmath.h",
    "iso646.h",
    "stdalign.h",
    "stdbool.h",
];

/// Tracks which recognized standard headers have already been emitted
/// during the current run. Flags only ever flip from unseen to emitted.
#[derive(Debug, Default)]
pub struct HeaderRegistry {
    emitted: HashSet<&'static str>,
}

impl HeaderRegistry {
    /// Create an empty registry (no header emitted yet)
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `name` is a recognized standard header
    pub fn recognizes(&self, name: &str) -> bool {
        STANDARD_HEADERS.iter().any(|header| *header == name)
    }

    /// Mark `name` as emitted, returning whether it had already been
    /// emitted in this run. Unrecognized names are never tracked and
    /// always report `false`.
    pub fn mark(&mut self, name: &str) -> bool {
        match STANDARD_HEADERS.iter().find(|h| **h == name) {
            Some(header) => !self.emitted.insert(header),
            None => false,
        }
    }
}
