#[macro_use]
mod common;

#[cfg(test)]
mod logical_operator {
    tests! {
        or in logical_operator is OK
        "1"
        "yes"
        "false"
    }

    tests! {
        and in logical_operator is OK
        "2"
        "nil"
        "ok"
    }

    tests! {
        short_circuit in logical_operator is OK
        "before"
        "before"
    }
}
