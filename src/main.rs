fn main() {
    duel_cli::cli::run();
}
