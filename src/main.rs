fn main() {
    serial_debug_lib::run()
}
