fn main() {
    game_launcher_lib::run()
}
