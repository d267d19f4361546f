mod parser_test;
mod subroutine_test;
mod resolver_test;
