/// Escribe una línea indentada del cuerpo de `main()`.
macro_rules! emit {
    ($context:expr, $($format:tt)*) => {{
        write!($context.output, "\t")?;
        writeln!($context.output, $($format)*)
    }};
}
