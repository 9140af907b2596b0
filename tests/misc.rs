#[macro_use]
mod common;

#[cfg(test)]
mod misc {
    tests! {
        empty_file in misc is OK
    }

    tests! {
        print_formats in misc is OK
        "3"
        "str"
        "true"
        "nil"
        "<fn f>"
    }

    tests! {
        unexpected_character in misc is ERR
        "[line 2] Error: Unexpected character '|'"
    }

    tests! {
        multiple_scan_errors in misc is ERR
        "[line 1] Error: Unexpected character '@'"
        "[line 2] Error: Unexpected character '#'"
    }

    tests! {
        missing_semicolon in misc is ERR
        "[line 2] Error at end: Expect ';' after value"
    }

    tests! {
        parse_recovery in misc is ERR
        "[line 1] Error at '1': Expect variable name"
    }
}
