#[macro_use]
mod common;

#[cfg(test)]
mod _break {
    tests! {
        inside_while in break is OK
        "0"
        "1"
        "2"
    }

    tests! {
        inside_for in break is OK
        "0"
        "1"
    }

    tests! {
        nested in break is OK
        "0"
        "1"
    }

    tests! {
        top_level in break is ERR
        "[line 1] Error at 'break': Break statement at the top level"
    }

    tests! {
        function_boundary in break is ERR
        "[line 2] Error at 'break': Break statement at the function level"
    }
}
