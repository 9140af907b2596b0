#[macro_use]
mod common;

#[cfg(test)]
mod operator {
    tests! {
        precedence in operator is OK
        "14"
        "8"
        "4"
        "true"
        "true"
        "true"
        "false"
        "false"
        "true"
    }

    tests! {
        unary in operator is OK
        "-3"
        "3"
        "true"
        "false"
        "true"
    }

    tests! {
        equality in operator is OK
        "true"
        "true"
        "false"
        "true"
        "false"
        "false"
        "true"
    }

    tests! {
        divide_by_zero in operator is ERR
        "[line 1] Error at '/': Division by zero"
    }

    tests! {
        add_mixed in operator is ERR
        "[line 1] Error at '+': Operands must be two numbers or two strings"
    }

    tests! {
        compare_strings in operator is ERR
        "[line 1] Error at '<': Operands must be numbers"
    }

    tests! {
        negate_string in operator is ERR
        "[line 1] Error at '-': Operand must be a number"
    }
}
