//! The `explain` command: describe a diagnostic code.

use reflect_diagnostic::ErrorCode;

pub fn explain_error(code_str: &str) {
    let Ok(code) = code_str.parse::<ErrorCode>() else {
        eprintln!("Unknown error code: {code_str}");
        eprintln!();
        eprintln!("Codes have the format EXXXX where X is a digit.");
        eprintln!("Examples: E2001, E3001, E4001");
        std::process::exit(1);
    };

    println!("{code}: {}", code.description());
    println!();
    println!("{}", explanation(code));
}

fn explanation(code: ErrorCode) -> &'static str {
    match code {
        ErrorCode::E0001 | ErrorCode::E0002 | ErrorCode::E0003 => {
            "The source could not be split into tokens. Fix the literal or character \
             at the reported position."
        }
        ErrorCode::E1001
        | ErrorCode::E1002
        | ErrorCode::E1003
        | ErrorCode::E1004
        | ErrorCode::E1005 => {
            "The source does not follow the supported Kotlin subset. No synthesis \
             runs on a file with parse errors."
        }
        ErrorCode::E2001 => {
            "Reflection, optics or a sample was requested for a declaration without a \
             fixed structure, such as an interface or an open class. Only data classes, \
             plain classes whose constructor parameters are all properties, objects, \
             sealed hierarchies and enums have a shape."
        }
        ErrorCode::E3001 => {
            "The decorators on one function cannot be combined: two of them rename the \
             wrapper, or an exclusive decorator is stacked with others."
        }
        ErrorCode::E4001 => {
            "Every suffixed candidate for a synthesized name is already taken. The whole \
             pass is discarded. Rename the clashing declarations or raise --max-suffix."
        }
        ErrorCode::E5001 => {
            "A sample needs a default for every member it reaches. Types without a \
             default (`Any`, function types, non-null recursion) are rejected; make the \
             member nullable or give it a supported type."
        }
        ErrorCode::E6001 => {
            "Evaluating the entry point failed. The note lists the call chain that led \
             to the failure."
        }
        ErrorCode::E9001 => {
            "The pass was cancelled between two declarations and nothing was inserted."
        }
        ErrorCode::E9002 => {
            "The error limit was reached and later errors were dropped. Use \
             --error-limit=0 to see all of them."
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_code_is_explained() {
        for &code in ErrorCode::ALL {
            assert!(!explanation(code).is_empty(), "{code}");
        }
    }
}
