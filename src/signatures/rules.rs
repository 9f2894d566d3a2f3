// SPDX-License-Identifier: PMPL-1.0-or-later

//! The static failure-signature table.
//!
//! Insertion order is report order. New signatures are added here without
//! touching the engine.

use super::{Signature, SignatureKind};

/// Build the known-failure table. Exactly one finding is emitted per
/// matching entry regardless of how often its marker occurs in a log.
pub fn signature_table() -> Vec<Signature> {
    vec![
        Signature {
            name: "NullPointerException",
            advice: "Mod tried to access a null value. Reset configs or remove the broken mod.",
            kind: SignatureKind::StackFrame,
        },
        Signature {
            name: "ClassNotFoundException",
            advice: "Missing dependency. Make sure all required mods are installed.",
            kind: SignatureKind::MissingClass,
        },
        Signature {
            name: "Mixin apply failed",
            advice: "A mod Mixin failed. Check for an outdated Fabric API or mod conflicts.",
            kind: SignatureKind::StackFrame,
        },
        Signature {
            name: "VerifyError",
            advice: "Bytecode error. Likely a coremod patch conflict.",
            kind: SignatureKind::StackFrame,
        },
        Signature {
            name: "NoSuchMethodError",
            advice: "A mod calls an API that no longer exists. Update the mod and its dependencies together.",
            kind: SignatureKind::StackFrame,
        },
        Signature {
            name: "OutOfMemoryError",
            advice: "The game ran out of heap. Allocate more RAM or remove memory-heavy mods.",
            kind: SignatureKind::StackFrame,
        },
    ]
}
