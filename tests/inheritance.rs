#[macro_use]
mod common;

#[cfg(test)]
mod inheritance {
    tests! {
        inherit_methods in inheritance is OK
        "base"
    }

    tests! {
        override_method in inheritance is OK
        "derived"
    }

    tests! {
        chain in inheritance is OK
        "a"
    }

    tests! {
        inherit_from_nil in inheritance is ERR
        "[line 2] Error at 'Nothing': Superclass must be a class"
    }
}
