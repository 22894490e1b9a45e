use planar_truss::{Condition, TrussResponse};
use std::fmt::Write;

/// Render a textual summary of a solved truss.
///
/// Reactions come first so the reader can check global equilibrium against the
/// applied loads before looking at individual members. See
/// <https://en.wikipedia.org/wiki/Mechanical_equilibrium>.
#[must_use]
pub fn render_report(response: &TrussResponse) -> String {
    let mut output = String::new();

    writeln!(&mut output, "Support reactions").expect("writing to string cannot fail");
    for (joint, reaction) in &response.reactions {
        writeln!(
            &mut output,
            "  joint {joint:>4}: Rx = {:>12.3}  Ry = {:>12.3}",
            reaction.x, reaction.y
        )
        .expect("writing to string cannot fail");
    }

    // Magnitudes are always positive; the condition column carries the sign.
    writeln!(&mut output, "Member forces").expect("writing to string cannot fail");
    for (member, force) in &response.forces {
        let condition = match force.condition {
            Condition::Tension => "tension",
            Condition::Compression => "compression",
        };
        writeln!(
            &mut output,
            "  member {member:>3}: {:>12.3}  {condition}",
            force.value
        )
        .expect("writing to string cannot fail");
    }

    output
}
