//! Listing and Encoding Integration Tests
//!
//! The assembly listing and the binary encoding of compiled programs, as
//! produced end to end from source text.

use bytecode::Program;

/// Helper that compiles source text and panics on failure
fn compile(source: &str) -> Program {
    match compiler::compile(source) {
        Ok(program) => program,
        Err(error) => panic!("compile failed: {}", error),
    }
}

/// Test: a minimal program renders the full expected listing
#[test]
fn test_listing_minimal_program() {
    let program = compile("program demo: main: let x = 2; output x end");
    assert_eq!(
        program.to_string(),
        ".program demo\n\
         \n\
         .sub main\n\
         .stack 1\n\
         .frame 1\n\
         \x20   push 2\n\
         \x20   store 0\n\
         \x20   load 0\n\
         \x20   print integer\n\
         \x20   return\n\
         .end\n"
    );
}

/// Test: subroutine headers carry the signature, main carries none
#[test]
fn test_listing_signatures() {
    let program = compile(
        "program demo: \
         twice: takes n as integer returns integer back n + n end \
         main: output twice(4) end",
    );
    assert_eq!(
        program.to_string(),
        ".program demo\n\
         \n\
         .sub twice takes integer returns integer\n\
         .stack 2\n\
         .frame 1\n\
         \x20   load 0\n\
         \x20   load 0\n\
         \x20   add\n\
         \x20   retval\n\
         .end\n\
         \n\
         .sub main\n\
         .stack 1\n\
         .frame 0\n\
         \x20   push 4\n\
         \x20   call twice\n\
         \x20   print integer\n\
         \x20   return\n\
         .end\n"
    );
}

/// Test: labels sit at the left margin while instructions stay indented
#[test]
fn test_listing_outdents_loop_labels() {
    let program = compile(
        "program demo: main: vars n as integer let n = 3; while n > 0: let n = n - 1 end end",
    );
    let listing = program.to_string();
    assert!(listing.contains("\nL1:\n    load 0\n"));
    assert!(listing.contains("\n    goto L1\nL0:\n    return\n.end\n"));
    assert!(listing.contains("    if_gt L2\n"));
    assert!(listing.contains("    if_ne L0\n"));
}

/// Test: every listing line is a directive, a label or an indented op
#[test]
fn test_listing_line_shapes() {
    let program = compile(
        "program demo: \
         odd: takes n as integer returns boolean back n mod 2 = 1 end \
         main: vars flag as boolean; i as integer \
         input i; let flag = odd(i); \
         if flag: output \"odd\" end else: output \"even\" end end",
    );
    let listing = program.to_string();
    assert!(listing.starts_with(".program demo\n"));
    assert!(listing.ends_with(".end\n"));
    for line in listing.lines() {
        let ok = line.is_empty()
            || line.starts_with(".program ")
            || line.starts_with(".sub ")
            || line.starts_with(".stack ")
            || line.starts_with(".frame ")
            || line == ".end"
            || (line.starts_with('L') && line.ends_with(':'))
            || line.starts_with("    ");
        assert!(ok, "unexpected listing line: {:?}", line);
    }
}

/// Test: string literals are re-escaped on their way into the listing
#[test]
fn test_listing_escapes_strings() {
    let program = compile("program demo: main: output \"say \\\"hi\\\"\\n\" end");
    let listing = program.to_string();
    assert!(listing.contains("    print \"say \\\"hi\\\"\\n\"\n"));
}

/// Test: compiling the same source twice gives identical output
#[test]
fn test_listing_is_deterministic() {
    let source = "program demo: \
                  sum: takes a as integer array, n as integer returns integer \
                  vars i, total as integer \
                  let i = 0; let total = 0; \
                  while i < n: let total = total + a[i]; let i = i + 1 end; \
                  back total end \
                  main: vars a as integer array let a = array 3; output sum(a, 3) end";
    let first = compile(source);
    let second = compile(source);
    assert_eq!(first, second);
    assert_eq!(first.to_string(), second.to_string());
}

/// Test: a compiled program survives the binary encoding unchanged
#[test]
fn test_binary_roundtrip_of_compiled_program() {
    let program = compile(
        "program demo: \
         fill: takes a as boolean array, n as integer \
         vars i as integer \
         let i = 0; \
         while i < n: let a[i] = i mod 2 = 0; let i = i + 1 end end \
         main: vars a as boolean array let a = array 4; do fill(a, 4); output a[1] end",
    );
    let bytes = program.to_bytes();
    let restored = Program::from_bytes(&bytes).expect("decode failed");
    assert_eq!(program, restored);
    assert_eq!(program.to_string(), restored.to_string());
}

/// Test: the encoding starts with the magic number and version
#[test]
fn test_binary_header() {
    let program = compile("program demo: main: chillax end");
    let bytes = program.to_bytes();
    assert_eq!(&bytes[..4], b"AMBC");
    assert_eq!(bytes[4], 1);
}

/// Test: every compiled subroutine has balanced labels
#[test]
fn test_compiled_labels_balance() {
    let program = compile(
        "program demo: main: vars n as integer \
         input n; \
         if n < 0: output \"neg\" end elif n = 0: output \"zero\" end else: output \"pos\" end; \
         while n > 0: let n = n - 1 end end",
    );
    for sub in &program.subroutines {
        assert!(sub.labels_balanced(), "unbalanced labels in {}", sub.name);
    }
}
