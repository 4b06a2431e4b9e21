fn main() -> anyhow::Result<()> {
    movie_finder_lib::run()
}
